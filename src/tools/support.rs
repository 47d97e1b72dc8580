//! Technical support: regional outage lookup.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendClient, ParamSpec, Tool, ToolArgs};

/// Check whether a region has known line, signal, or internet problems.
pub struct LocationProblems {
    backend: Arc<BackendClient>,
}

impl LocationProblems {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for LocationProblems {
    fn name(&self) -> &str {
        "control_location_have_problem"
    }

    fn description(&self) -> &str {
        "Belirtilen konumdaki (il, ilçe veya semt) bilinen internet, hat ve sinyal sorunlarını sorgular. \
         Müşteri bağlantı sorunu bildirdiğinde önce bölgesel arızaları kontrol etmek için kullanın."
    }

    fn parameters(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required(
            "location",
            "Konum/bölge adı (örn: İstanbul, Kadıköy)",
        )];
        PARAMS
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<String> {
        let location = args.text("location").trim();
        if location.is_empty() {
            return Ok("Lütfen sorun yaşadığınız konumu (il, ilçe veya semt) belirtin.".to_string());
        }

        let path = format!("problems/location/{}", urlencoding::encode(location));
        match self.backend.get(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.is_not_found() => Ok(format!(
                "{} bölgesinde şu anda bilinen bir sorun bulunmuyor.",
                location
            )),
            Err(e) => Ok(e.user_message("Bölgesel sorun bilgileri")),
        }
    }
}
