pub mod beeswarm_vis2d;
