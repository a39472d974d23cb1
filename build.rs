fn main() {
    // ESP-IDF link settings only matter for the device; host builds run the tests.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
