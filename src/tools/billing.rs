//! Subscription and invoice lookups.

use std::sync::Arc;

use super::lookup::PhoneLookup;
use super::BackendClient;

pub fn active_subscription(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "get_active_subscription",
        description: "Müşterinin aktif aboneliğini (başlangıç/bitiş tarihi, taahhüt durumu) sorgular.",
        endpoint: |phone| format!("subs/{}/activesub", phone),
        not_found: "Bu telefon numarasına ({phone}) ait aktif abonelik bulunamadı.",
        subject: "Abonelik bilgileri",
        backend,
    }
}

pub fn active_invoice(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "get_active_invoice",
        description: "Müşterinin güncel (ödenmemiş) faturasının tutarını ve son ödeme tarihini getirir.",
        endpoint: |phone| format!("invoices/phone/{}/activeinvoice", phone),
        not_found: "Bu telefon numarasına ({phone}) ait güncel fatura bulunamadı.",
        subject: "Fatura bilgileri",
        backend,
    }
}

pub fn active_invoice_items(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "get_active_invoice_items",
        description: "Güncel faturadaki kalemleri tek tek listeler. Müşteri faturasının neden \
                      yüksek geldiğini sorduğunda kullanın.",
        endpoint: |phone| format!("invoices/phone/{}/activeinvoice/items", phone),
        not_found: "Bu telefon numarasına ({phone}) ait güncel fatura kalemi bulunamadı.",
        subject: "Fatura kalemleri",
        backend,
    }
}

pub fn invoices(backend: Arc<BackendClient>) -> PhoneLookup {
    PhoneLookup {
        name: "get_invoices",
        description: "Müşterinin geçmiş faturalarının listesini getirir.",
        endpoint: |phone| format!("invoices/phone/{}/invoices", phone),
        not_found: "Bu telefon numarasına ({phone}) ait fatura kaydı bulunamadı.",
        subject: "Fatura geçmişi",
        backend,
    }
}
