#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    // RUST_LOG controls verbosity
    env_logger::init();

    // File dialogs are spawned on the tokio runtime
    bot_flow_editor::run_app()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
