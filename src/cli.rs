//! Command-line surface: `wasm-serve [port]`

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "wasm-serve")]
#[command(about = "Serve a WebAssembly bundle with cross-origin isolation headers")]
#[command(version)]
pub struct Cli {
    /// TCP port to listen on (defaults to 8080)
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_argument_leaves_port_unset() {
        let cli = Cli::try_parse_from(["wasm-serve"]).unwrap();
        assert_eq!(cli.port, None);
    }

    #[test]
    fn test_numeric_port() {
        let cli = Cli::try_parse_from(["wasm-serve", "9090"]).unwrap();
        assert_eq!(cli.port, Some(9090));
    }

    #[test]
    fn test_rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["wasm-serve", "abc"]).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_port() {
        assert!(Cli::try_parse_from(["wasm-serve", "0"]).is_err());
        assert!(Cli::try_parse_from(["wasm-serve", "65536"]).is_err());
        assert!(Cli::try_parse_from(["wasm-serve", "-1"]).is_err());
    }
}
