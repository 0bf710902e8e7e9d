use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    rulechat::cli::main()
}
