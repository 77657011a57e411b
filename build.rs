use std::env;
use std::fs;
use std::path::Path;

/// Solo se reenvían al compilador las variables del portal
const PREFIX: &str = "HR_";

fn main() {
    // Cargar variables de entorno desde .env si existe
    let env_file = Path::new(".env");

    if let Ok(contents) = fs::read_to_string(env_file) {
        println!("cargo:rerun-if-changed=.env");

        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            // Las variables del entorno real tienen prioridad sobre .env
            if key.starts_with(PREFIX) && env::var(key).is_err() {
                println!("cargo:rustc-env={}={}", key, value);
            }
        }
    }

    for key in [
        "HR_BACKEND_URL_DEVELOPMENT",
        "HR_BACKEND_URL_PRODUCTION",
        "HR_ENVIRONMENT",
        "HR_ENABLE_LOGGING",
        "HR_STORAGE_KEY",
    ] {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
