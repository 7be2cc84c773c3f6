/// Keeps the first four characters of a secret so logs can tell keys apart.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        return "***".to_string();
    }
    format!("{visible}***")
}
