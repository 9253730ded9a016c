//! Drives the parallel tile scheduler directly, timing matmul throughput
//! across a range of sizes. Mirrors the teacher crate's `multithreaded`
//! stress example, but exercises this crate's actual public surface
//! (`Matrix::matmul`) rather than raw AMX instructions in a busy loop.

use amx_matmul::Matrix;
use clap::Parser;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Opts {
    /// Square matrix dimension to multiply.
    #[arg(short, long, default_value_t = 512)]
    size: usize,

    /// Number of repetitions to average over.
    #[arg(short, long, default_value_t = 5)]
    repeat: usize,
}

fn main() {
    env_logger::init();
    let opts = Opts::parse();

    println!(
        "amx_matmul: chip={:?} amx_available={} perf_cores={}",
        amx_matmul::detect(),
        amx_matmul::is_available(),
        amx_matmul::perf_core_count(),
    );

    let a = Matrix::fill(opts.size, opts.size, 1.0).expect("allocate A");
    let b = Matrix::fill(opts.size, opts.size, 2.0).expect("allocate B");

    let mut best = f64::INFINITY;
    for rep in 0..opts.repeat {
        let start = Instant::now();
        let c = a.matmul(&b).expect("matmul");
        let elapsed = start.elapsed().as_secs_f64();
        best = best.min(elapsed);
        let flops = 2.0 * (opts.size as f64).powi(3);
        println!(
            "rep {rep}: {:.3} ms ({:.2} GFLOP/s), c[0][0]={}",
            elapsed * 1e3,
            flops / elapsed / 1e9,
            c.get(0, 0)
        );
    }
    println!("best: {:.3} ms", best * 1e3);
}
