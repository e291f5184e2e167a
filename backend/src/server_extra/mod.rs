pub mod config_route;
