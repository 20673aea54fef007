pub mod archive;
pub mod cleaner;
pub mod collision;
pub mod config;
pub mod fs_utils;
pub mod grammar;
pub mod organizer;
pub mod pipeline;
pub mod report;
pub mod unpacker;
