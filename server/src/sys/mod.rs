pub mod natural_spawn;
