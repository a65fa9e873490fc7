//! Train a 2-2-1 sigmoid network on XOR with finite-difference descent.
//!
//! Run with `RUST_LOG=info cargo run --example xor` to see training progress.

use stratamx::prelude::*;
use tracing_subscriber::EnvFilter;

const XOR: &str = "\
0,0,0
0,1,1
1,0,1
1,1,0
";

fn main() -> Result<(), MatrixError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let data = parse_csv(XOR)?;
    let ti = data.col_slice(0, 1)?;
    let to = data.col_slice(2, 2)?;

    let mut nn = Network::new(&[2, 2, 1])?;
    let trainer = Trainer::new(TrainConfig::default().with_seed(69));
    let report = trainer.fit(&mut nn, &ti, &to)?;

    println!(
        "cost: {:.6} -> {:.6}",
        report.initial_cost, report.final_cost
    );
    print!("{}", nn.render("nn"));

    println!("------------------");
    for i in 0..2 {
        for j in 0..2 {
            let x = Matrix::from_slice(1, 2, &[i as Scalar, j as Scalar])?;
            nn.forward(&x)?;
            println!("{i} ^ {j} = {:.6}", nn.output().get(0, 0));
        }
    }
    Ok(())
}
