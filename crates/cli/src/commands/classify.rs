use unisync_core::classify;

pub(crate) fn run(name: &str) {
    match classify(Some(name)) {
        Some(kind) => println!("{kind}"),
        None => println!("none"),
    }
}
