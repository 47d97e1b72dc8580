//! Package catalogue and per-customer usage tools.

use std::sync::Arc;

use async_trait::async_trait;

use super::lookup::PhoneLookup;
use super::{BackendClient, ParamSpec, Tool, ToolArgs};

const PACKAGE_TYPES: [&str; 2] = ["mobil", "ev"];

/// List every active package and tariff.
pub struct AllPackages {
    backend: Arc<BackendClient>,
}

impl AllPackages {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for AllPackages {
    fn name(&self) -> &str {
        "get_all_packages"
    }

    fn description(&self) -> &str {
        "Şirketin tüm aktif paket ve tarifelerini (mobil ve ev interneti) listeler. \
         Müşteri genel olarak hangi paketlerin olduğunu sorduğunda kullanın."
    }

    async fn execute(&self, _args: ToolArgs) -> anyhow::Result<String> {
        match self.backend.get("packages").await {
            Ok(body) => Ok(body),
            Err(e) if e.is_not_found() => {
                Ok("Şu anda aktif paket bulunamadı. Lütfen daha sonra tekrar deneyin.".to_string())
            }
            Err(e) => Ok(e.user_message("Paket listesi")),
        }
    }
}

/// List packages of one type (`mobil` or `ev`).
pub struct PackagesByType {
    backend: Arc<BackendClient>,
}

impl PackagesByType {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for PackagesByType {
    fn name(&self) -> &str {
        "get_packages_by_type"
    }

    fn description(&self) -> &str {
        "Paket türüne göre paketleri listeler. Yalnızca 'mobil' (mobil hat/internet) veya \
         'ev' (ev interneti) değerlerini kabul eder."
    }

    fn parameters(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required(
            "package_type",
            "Paket türü: 'mobil' veya 'ev'",
        )];
        PARAMS
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<String> {
        let package_type = args.text("package_type").trim().to_lowercase();
        if !PACKAGE_TYPES.contains(&package_type.as_str()) {
            return Ok(
                "Geçersiz paket türü. Lütfen 'mobil' veya 'ev' türlerinden birini belirtin."
                    .to_string(),
            );
        }

        match self.backend.get(&format!("packages/{}", package_type)).await {
            Ok(body) => Ok(body),
            Err(e) if e.is_not_found() => {
                Ok(format!("{} türünde paket bulunamadı.", package_type))
            }
            Err(e) => Ok(e.user_message("Paketler")),
        }
    }
}

/// Look up a single package by its name.
pub struct PackageByName {
    backend: Arc<BackendClient>,
}

impl PackageByName {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for PackageByName {
    fn name(&self) -> &str {
        "get_package_by_name"
    }

    fn description(&self) -> &str {
        "Adı verilen paketin ayrıntılarını (fiyat, dakika, SMS, internet kotası) getirir."
    }

    fn parameters(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required("package_name", "Paketin adı")];
        PARAMS
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<String> {
        let name = args.text("package_name").trim();
        if name.is_empty() {
            return Ok("Lütfen bilgi almak istediğiniz paketin adını belirtin.".to_string());
        }

        let path = format!("packages/{}", urlencoding::encode(name));
        match self.backend.get(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.is_not_found() => Ok(format!("'{}' adında bir paket bulunamadı.", name)),
            Err(e) => Ok(e.user_message("Paket bilgileri")),
        }
    }
}

/// The customer's active package.
pub fn package_by_usernumber(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "get_package_by_usernumber",
        description: "Müşterinin telefon numarasına göre aktif paketini sorgular. Müşteri mevcut \
                      paketini öğrenmek istediğinde veya paket değişikliğinden önce kullanın.",
        endpoint: |phone| format!("users/phone/{}/package", phone),
        not_found: "Bu telefon numarasında ({phone}) aktif paket bulunamadı veya kullanıcı sistemde kayıtlı değil.",
        subject: "Paket bilgileri",
        backend,
    }
}

/// Remaining minutes, SMS, and data of the active package.
pub fn remaining_uses(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "get_user_remaining_uses",
        description: "Müşterinin kalan dakika, SMS ve internet kotasını sorgular.",
        endpoint: |phone| format!("remaining-uses/phone/{}", phone),
        not_found: "Bu telefon numarası ({phone}) için kalan kullanım bilgisi bulunamadı veya kullanıcı sistemde kayıtlı değil.",
        subject: "Kalan kullanım bilgileri",
        backend,
    }
}

/// Extra services the customer bought.
pub fn service_purchases(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "get_service_purchases",
        description: "Müşterinin daha önce satın aldığı ek hizmetleri ve paketleri listeler.",
        endpoint: |phone| format!("service-purchases/phone/{}", phone),
        not_found: "Bu telefon numarasına ({phone}) ait satın alınmış hizmet bulunamadı.",
        subject: "Hizmet satın alma bilgileri",
        backend,
    }
}
