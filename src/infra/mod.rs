pub mod asana;
pub mod buckets;
