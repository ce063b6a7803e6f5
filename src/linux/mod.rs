pub mod blkdev;
pub mod user;
