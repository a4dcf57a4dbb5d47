use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tarjemli::cli::main()
}
