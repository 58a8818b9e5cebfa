pub mod enumerator;
