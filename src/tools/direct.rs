//! Tools that answer without touching the backend.

use async_trait::async_trait;

use super::{ParamSpec, Tool, ToolArgs};

/// Name of the reserved direct-answer tool.
pub const FINAL_ANSWER_TOOL: &str = "final_answer";

/// Reply to the customer directly. Terminal: the message is returned as-is.
pub struct FinalAnswer;

#[async_trait]
impl Tool for FinalAnswer {
    fn name(&self) -> &str {
        FINAL_ANSWER_TOOL
    }

    fn description(&self) -> &str {
        "Müşteriye doğrudan yanıt vermek için kullanılır. Girdi, müşteriye iletilecek mesajın kendisidir."
    }

    fn parameters(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required(
            "message",
            "Müşteriye iletilecek mesaj",
        )];
        PARAMS
    }

    fn is_terminal(&self) -> bool {
        true
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<String> {
        Ok(args.text("message").to_string())
    }
}

/// Ask the customer for their phone number.
pub struct RequestPhoneNumber;

#[async_trait]
impl Tool for RequestPhoneNumber {
    fn name(&self) -> &str {
        "request_phone_number"
    }

    fn description(&self) -> &str {
        "Müşteriye özel bir işlem (fatura, paket, kalan kullanım vb.) için telefon numarası gerekiyorsa \
         ve numara konuşma geçmişinde yoksa müşteriden numarasını ister."
    }

    async fn execute(&self, _args: ToolArgs) -> anyhow::Result<String> {
        Ok("📞 İşleminize devam edebilmem için telefon numaranıza ihtiyacım var.\n\n\
            Lütfen 11 haneli numaranızı yazın:\n\
            • Örnek: 05551234567\n\
            • Boşluk veya tire kullanabilirsiniz: 0555 123 45 67"
            .to_string())
    }
}
