mod app;
mod bridge;
mod browser;
mod config;
mod context;
mod dto;
mod events;
mod login;
mod selector;
mod views;

fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    tracing::info!("mounting research dashboard");
    leptos::mount_to_body(app::App);
}
