#[cfg(not(target_arch = "wasm32"))]
fn init_environment() {
    // A missing .env is normal; the bundled config fills the gaps.
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("failed to read .env: {}", err);
    }

    if let Err(err) = simplechatbot::logging::init() {
        eprintln!("{}", err);
    }
}

#[cfg(target_arch = "wasm32")]
fn init_environment() {}

fn main() {
    init_environment();
    tracing::info!("starting SimpleChatBot");
    dioxus::launch(simplechatbot::ui::App);
}
