use clap::Parser;

use ingress::{IngressConfig, IngressKind, SpecialSide, VoteWeighting};

/// Partitions a graph_map graph across timely workers and reports placement quality.
#[derive(Parser, Debug, Clone)]
struct Args {
    /// Graph in graph_map format (`<name>.offsets` / `<name>.targets`).
    filename: String,
    /// `bipartite` or `hash`.
    #[arg(long, default_value = "bipartite")]
    ingress: IngressKind,
    /// Which endpoint is special: `source` or `target`.
    #[arg(long, default_value = "source")]
    special: SpecialSide,
    /// `uniform` or `inverse-degree`.
    #[arg(long, default_value = "uniform")]
    weighting: VoteWeighting,
    /// Arguments for timely, e.g. `-- -w 4`.
    #[arg(last = true)]
    timely: Vec<String>,
}

fn main() {

    env_logger::init();
    let args = Args::parse();
    let config = IngressConfig { special: args.special, weighting: args.weighting };
    let timely_args = args.timely.clone();

    timely::execute_from_args(timely_args.into_iter(), move |worker| {

        let index = worker.index();
        let peers = worker.peers();
        let timer = worker.timer();

        let edges = ingress::load_graph(&args.filename, index, peers);

        println!("{:?}\tLoaded {} edges", timer.elapsed(), edges.len());

        let graph = ingress::driver::partition(worker, args.ingress, config, edges).expect("partitioning failed");

        println!("{:?}\tPartitioned: {} vertices ({} mastered), {} edges", timer.elapsed(), graph.num_vertices(), graph.num_masters(), graph.num_edges());

        ingress::driver::report_quality(worker, &graph);

        if index == 0 {
            println!("{:?}\tQuality reported", timer.elapsed());
        }

    }).expect("Timely computation failed to start");
}
