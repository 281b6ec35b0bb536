pub struct DefaultsConfig {
    pub profile_name: String,
    pub run_command: String,
    pub csv_delimiter: char,
    pub csv_has_headers: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            profile_name: "default".to_string(),
            run_command: "$command".to_string(),
            csv_delimiter: ',',
            csv_has_headers: true,
        }
    }
}
