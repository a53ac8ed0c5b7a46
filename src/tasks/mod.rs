pub mod results_watcher;
