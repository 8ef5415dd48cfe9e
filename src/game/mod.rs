pub mod surfaceflags;
