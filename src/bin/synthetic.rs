use clap::Parser;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use ingress::{IngressConfig, IngressKind, SpecialSide, VertexId, VoteWeighting};

/// Partitions a random bipartite graph with a skewed special side.
#[derive(Parser, Debug, Clone)]
struct Args {
    /// Number of special vertices; ids `0 .. specials`.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    specials: u64,
    /// Number of common vertices; ids follow the special ones.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    commons: u64,
    /// Total number of edges, split across workers.
    edges: usize,
    #[arg(long, default_value = "bipartite")]
    ingress: IngressKind,
    #[arg(long, default_value = "uniform")]
    weighting: VoteWeighting,
    /// Arguments for timely, e.g. `-- -w 4`.
    #[arg(last = true)]
    timely: Vec<String>,
}

fn main() {

    env_logger::init();
    let args = Args::parse();
    let config = IngressConfig { special: SpecialSide::Source, weighting: args.weighting };
    let timely_args = args.timely.clone();

    timely::execute_from_args(timely_args.into_iter(), move |worker| {

        let index = worker.index();
        let peers = worker.peers();
        let timer = worker.timer();

        // Cubing a uniform sample piles most edges onto the low special ids.
        let mut rng = StdRng::seed_from_u64(index as u64);
        let count = args.edges / peers + if args.edges % peers > index { 1 } else { 0 };
        let edges: Vec<(VertexId, VertexId)> = (0 .. count)
            .map(|_| {
                let skew: f64 = rng.gen();
                let special = ((skew * skew * skew) * args.specials as f64) as VertexId;
                let common = args.specials + rng.gen_range(0 .. args.commons);
                (special.min(args.specials - 1), common)
            })
            .collect();

        if index == 0 {
            println!("{:?}\tGenerated {} edges", timer.elapsed(), edges.len());
        }

        let graph = ingress::driver::partition(worker, args.ingress, config, edges).expect("partitioning failed");

        println!("{:?}\tPartitioned: {} vertices ({} mastered), {} edges", timer.elapsed(), graph.num_vertices(), graph.num_masters(), graph.num_edges());

        ingress::driver::report_quality(worker, &graph);

    }).expect("Timely computation failed to start");
}
