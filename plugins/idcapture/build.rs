fn main() {
    tauri_plugin::Builder::new(&[
        "execute_method",
        "get_defaults",
        "subscribe_events",
        "unsubscribe_events",
    ])
    .build();
}
