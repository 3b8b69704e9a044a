fn main() {
    // Emit ESP-IDF link metadata only for firmware builds; host-target
    // test builds (no "espidf" feature) skip it entirely.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
