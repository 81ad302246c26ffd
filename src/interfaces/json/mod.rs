pub mod snapshot_reader;
