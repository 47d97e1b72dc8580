//! Customer account tools: lookup, signup guidance, and account creation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::lookup::PhoneLookup;
use super::{normalize_phone, BackendClient, ParamSpec, Tool, ToolArgs, INVALID_PHONE_MESSAGE};

/// Look up the customer record registered to a phone number.
pub fn control_by_phonenumber(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "control_by_phonenumber",
        description: "Telefon numarasıyla müşteri kaydını sorgular ve müşteri bilgilerini (JSON) döndürür. \
                      Müşterinin sistemde kayıtlı olup olmadığını kontrol etmek için kullanın.",
        endpoint: |phone| format!("users/phone/{}", phone),
        not_found: "Bu telefon numarasında ({phone}) kayıtlı müşteri bulunamadı.",
        subject: "Müşteri bilgileri",
        backend,
    }
}

/// Tell the customer which details account creation needs.
pub struct RequestUserInfo;

#[async_trait]
impl Tool for RequestUserInfo {
    fn name(&self) -> &str {
        "request_user_info"
    }

    fn description(&self) -> &str {
        "Müşteri yeni hat açmak veya hesap oluşturmak istediğinde, gerekli kişisel bilgileri \
         (ad soyad, telefon, isteğe bağlı e-posta) müşteriden ister."
    }

    async fn execute(&self, _args: ToolArgs) -> anyhow::Result<String> {
        Ok("Yeni hesabınızı oluşturabilmem için şu bilgilere ihtiyacım var:\n\n\
            📝 Gerekli bilgiler:\n\
            1. **Ad Soyad**: Tam adınız\n\
            2. **Telefon Numarası**: 11 haneli numaranız (örn: 05551234567)\n\
            3. **E-posta**: İletişim adresiniz (isteğe bağlı)\n\n\
            Bilgileri paylaştığınızda hesabınızı hemen açabilirim."
            .to_string())
    }
}

#[derive(Debug, Serialize)]
struct NewUser<'a> {
    name: &'a str,
    phone: &'a str,
    email: &'a str,
}

/// Create a customer account.
pub struct PostNewUser {
    backend: Arc<BackendClient>,
}

impl PostNewUser {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for PostNewUser {
    fn name(&self) -> &str {
        "post_new_user"
    }

    fn description(&self) -> &str {
        "Yeni müşteri hesabı oluşturur. Girdi biçimi: name=<ad soyad>, phone=<telefon>, email=<e-posta>. \
         E-posta isteğe bağlıdır."
    }

    fn parameters(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::required("name", "Müşterinin adı ve soyadı"),
            ParamSpec::required("phone", "11 haneli telefon numarası (örn: 05551234567)"),
            ParamSpec::optional("email", "E-posta adresi"),
        ];
        PARAMS
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<String> {
        let Ok(phone) = normalize_phone(args.text("phone")) else {
            return Ok(INVALID_PHONE_MESSAGE.to_string());
        };

        let name = args.text("name").trim();
        if name.chars().count() < 2 {
            return Ok(
                "Geçersiz ad bilgisi. Lütfen adınızı ve soyadınızı tam olarak yazın.".to_string(),
            );
        }
        let email = args.text("email").trim();

        let payload = NewUser {
            name,
            phone: &phone,
            email,
        };

        match self.backend.post_json("users", &payload).await {
            Ok(_) => {
                tracing::info!(phone = %phone, "Created customer account");
                Ok(format!(
                    "✅ Hesabınız başarıyla oluşturuldu!\n\n📋 Hesap bilgileri:\n• Ad: {}\n• Telefon: {}\n• E-posta: {}\n\n\
                     Artık hizmetlerimizden yararlanabilirsiniz.",
                    name,
                    phone,
                    if email.is_empty() { "Belirtilmedi" } else { email }
                ))
            }
            Err(e) => Ok(match e.status() {
                Some(409) => "Bu telefon numarası sistemimizde zaten kayıtlı. Mevcut hesabınızla \
                              devam etmek için numaranızı doğrulayabilirsiniz."
                    .to_string(),
                Some(400) => "Girilen bilgilerde hata var. Lütfen ad ve telefon bilgilerinizi \
                              kontrol edin."
                    .to_string(),
                Some(code) => format!("Hesap oluşturulamadı. Sistem hatası (HTTP {}).", code),
                None => format!(
                    "{}. Lütfen tekrar deneyin veya müşteri hizmetleriyle iletişime geçin.",
                    e.user_message("Hesap bilgileri")
                ),
            }),
        }
    }
}
