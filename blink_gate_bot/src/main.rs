use bot_commons::*;

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "WARN,blink_gate_bot=debug");
    }
    start_everything(blink_gate_bot::entry());
}
