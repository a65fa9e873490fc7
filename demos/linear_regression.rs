//! Fit `y = 2·x1 + 3·x2` by batch gradient descent on a small dataset.

use stratamx::prelude::*;
use tracing_subscriber::EnvFilter;

const DATA: &str = "\
1,0,2
0,1,3
1,1,5
2,1,7
1,2,8
3,1,9
";

fn main() -> Result<(), MatrixError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let data = parse_csv(DATA)?;
    let x = data.col_slice(0, 1)?;
    let y = data.col_slice(2, 2)?;
    print!("{}", x.render("x", 0));
    print!("{}", y.render("y", 0));

    let w = GradientDescent::new(0.05)
        .with_iterations(2_000)
        .fit(&x, &y, Matrix::zeros(2, 1)?)?;
    print!("{}", w.render("w", 0));

    let predictions = x.dot(&w)?;
    let residual = y.sub(&predictions)?;
    println!("mse: {:.6}", residual.self_dot()? / x.n_rows() as Scalar);
    Ok(())
}
