//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, key: &str) -> Option<String>;

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_string(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
