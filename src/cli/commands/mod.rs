pub mod db;
pub mod stitch;
