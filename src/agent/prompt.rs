//! Prompt template for the customer service agent.

use std::fmt::Write;

use crate::session::Turn;
use crate::tools::ToolDescription;

/// One completed tool step of the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchStep {
    pub thought: String,
    pub action: String,
    pub action_input: String,
    pub observation: String,
}

/// Everything the template needs. Rendering is a pure function of this.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub tools: &'a [ToolDescription],
    pub history: &'a [Turn],
    pub input: &'a str,
    pub scratch: &'a [ScratchStep],
    /// Extra instruction after a malformed model reply.
    pub format_reminder: Option<&'a str>,
}

/// Build the full prompt for one model call.
pub fn build_prompt(ctx: &PromptContext<'_>) -> String {
    let tool_catalog = ctx
        .tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let history = if ctx.history.is_empty() {
        "(henüz konuşma yok)".to_string()
    } else {
        ctx.history
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut prompt = format!(
        r#"Sen bir telekomünikasyon şirketinin güler yüzlü ve deneyimli müşteri temsilcisisin. 🎧
Görevin, aşağıdaki araçları kullanarak müşterinin isteğini hızlı ve doğru biçimde çözmek.

<kurallar>
1. Önce müşterinin ne istediğini anla. İşlem için gereken bilgi (ör. telefon numarası) elinde mi, kontrol et.
2. Gereken bilgi <konusma_gecmisi> içinde varsa müşteriden tekrar isteme.
3. Araç gerekiyorsa <araclar> listesinden en uygun olanı seç. Listede olmayan bir araç adı yazma.
4. Her yanıta "Thought:" ile başla ve ne yapacağını kısaca düşün.
5. Selamlaşma veya teşekkür gibi araç gerektirmeyen mesajlara doğrudan "Final Answer:" ile yanıt ver.
6. Telekomünikasyon dışındaki sorulara (hava durumu, güncel olaylar vb.) hizmet kapsamının dışında olduğunu nazikçe belirt.
</kurallar>

<araclar>
{tool_catalog}
</araclar>

<konusma_gecmisi>
{history}
</konusma_gecmisi>

<musteri_sorusu>
{input}
</musteri_sorusu>

<yanit_formati>
Araç kullanacaksan:
Thought: <düşüncen: geçmişte gerekli bilgi var mı, hangi araç, hangi parametreler>
Action: <araclar listesindeki adlardan biri, başka hiçbir şey>
Action Input: <aracın girdisi: tek bir değer, anahtar=değer çiftleri veya JSON nesnesi>

Araç sonucu (Observation) yeterliyse ya da araç gerekmiyorsa:
Thought: <düşüncen>
Final Answer: <müşteriye verilecek yanıt>
</yanit_formati>
"#,
        tool_catalog = tool_catalog,
        history = history,
        input = ctx.input.trim(),
    );

    if let Some(reminder) = ctx.format_reminder {
        let _ = write!(prompt, "\n<format_uyarisi>\n{}\n</format_uyarisi>\n", reminder);
    }

    if !ctx.scratch.is_empty() {
        prompt.push('\n');
        for step in ctx.scratch {
            let _ = write!(
                prompt,
                "Thought: {}\nAction: {}\nAction Input: {}\nObservation: {}\n",
                step.thought, step.action, step.action_input, step.observation
            );
        }
        prompt.push_str("Thought:");
    }

    prompt
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use regex::Regex;

    use super::*;
    use crate::session::Role;
    use crate::tools::{default_registry, BackendClient, Tool, ToolArgs};

    struct StoreLocator;

    #[async_trait]
    impl Tool for StoreLocator {
        fn name(&self) -> &str {
            "find_nearest_store"
        }

        fn description(&self) -> &str {
            "En yakın mağazayı bulur."
        }

        async fn execute(&self, _args: ToolArgs) -> anyhow::Result<String> {
            Ok("Kadıköy mağazası".to_string())
        }
    }

    fn tools() -> Vec<ToolDescription> {
        vec![
            ToolDescription {
                name: "final_answer".to_string(),
                description: "Doğrudan yanıt.".to_string(),
            },
            ToolDescription {
                name: "lookup_weather_station".to_string(),
                description: "İstasyon arar.".to_string(),
            },
        ]
    }

    #[test]
    fn each_tool_name_appears_once() {
        let tools = tools();
        let prompt = build_prompt(&PromptContext {
            tools: &tools,
            history: &[],
            input: "Merhaba",
            scratch: &[],
            format_reminder: None,
        });
        assert_eq!(prompt.matches("lookup_weather_station").count(), 1);
        assert!(prompt.contains("lookup_weather_station: İstasyon arar."));
    }

    #[test]
    fn registered_tool_names_appear_once_in_the_prompt() {
        let backend =
            BackendClient::new("http://127.0.0.1:9/api/v1", Duration::from_secs(1)).unwrap();
        let mut registry = default_registry(backend, Duration::from_secs(1)).unwrap();
        registry.register(StoreLocator).unwrap();

        let tools = registry.describe_all();
        let prompt = build_prompt(&PromptContext {
            tools: &tools,
            history: &[],
            input: "Merhaba",
            scratch: &[],
            format_reminder: None,
        });

        for name in registry.names() {
            let whole_word = Regex::new(&format!(r"\b{}\b", regex::escape(name))).unwrap();
            assert_eq!(whole_word.find_iter(&prompt).count(), 1, "{name}");
        }
    }

    #[test]
    fn tools_render_in_registry_order() {
        let tools = tools();
        let prompt = build_prompt(&PromptContext {
            tools: &tools,
            history: &[],
            input: "x",
            scratch: &[],
            format_reminder: None,
        });
        let first = prompt.find("final_answer:").unwrap();
        let second = prompt.find("lookup_weather_station:").unwrap();
        assert!(first < second);
    }

    #[test]
    fn history_is_role_tagged_and_chronological() {
        let history = vec![
            Turn::new(Role::User, "Ben Ahmet"),
            Turn::new(Role::Agent, "Memnun oldum Ahmet Bey"),
        ];
        let prompt = build_prompt(&PromptContext {
            tools: &[],
            history: &history,
            input: "Adım neydi?",
            scratch: &[],
            format_reminder: None,
        });
        assert!(prompt.contains("Müşteri: Ben Ahmet\nTemsilci: Memnun oldum Ahmet Bey"));
        assert!(prompt.contains("<musteri_sorusu>\nAdım neydi?\n</musteri_sorusu>"));
    }

    #[test]
    fn scratch_log_continues_the_pattern() {
        let scratch = vec![ScratchStep {
            thought: "Paket bilgisine bakmalıyım".to_string(),
            action: "get_package_by_usernumber".to_string(),
            action_input: "05551234567".to_string(),
            observation: "{\"package\":\"Mega\"}".to_string(),
        }];
        let prompt = build_prompt(&PromptContext {
            tools: &[],
            history: &[],
            input: "Paketim ne?",
            scratch: &scratch,
            format_reminder: None,
        });
        assert!(prompt.ends_with(
            "Thought: Paket bilgisine bakmalıyım\nAction: get_package_by_usernumber\n\
             Action Input: 05551234567\nObservation: {\"package\":\"Mega\"}\nThought:"
        ));
    }

    #[test]
    fn rendering_is_deterministic() {
        let tools = tools();
        let history = vec![Turn::new(Role::User, "selam")];
        let ctx = PromptContext {
            tools: &tools,
            history: &history,
            input: "Merhaba",
            scratch: &[],
            format_reminder: Some("Biçime uy."),
        };
        assert_eq!(build_prompt(&ctx), build_prompt(&ctx));
        assert!(build_prompt(&ctx).contains("<format_uyarisi>\nBiçime uy.\n</format_uyarisi>"));
    }
}
