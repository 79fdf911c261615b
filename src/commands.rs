pub mod create_keys;
