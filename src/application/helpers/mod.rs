pub mod filter_parsing;
