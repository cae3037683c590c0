use dotenv::dotenv;

mod cli;

fn main() {
    dotenv().ok();

    if let Err(err) = cli::main() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
