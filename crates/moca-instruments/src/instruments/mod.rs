pub mod moca;
