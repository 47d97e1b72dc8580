//! Interactive terminal chat with the agent.
//!
//! Reads one message per line from stdin. `/clear` forgets the conversation,
//! `/quit` exits.

use callcenter_agent::{agent::Agent, config::Config};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callcenter_agent=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let agent = Agent::from_config(&config)?;
    let session_id = format!("cli-{}", Uuid::new_v4());

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(
            "📞 Çağrı merkezi asistanı hazır. Çıkmak için /quit, geçmişi silmek için /clear yazın.\n"
                .as_bytes(),
        )
        .await?;

    loop {
        stdout.write_all("\nSiz: ".as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        match message {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                agent.sessions().clear(&session_id).await;
                stdout.write_all("Konuşma geçmişi temizlendi.\n".as_bytes()).await?;
                continue;
            }
            _ => {}
        }

        let answer = match agent.chat(message, Some(&session_id)).await {
            Ok(reply) => reply.text,
            Err(e) => format!("Hata: {}", e),
        };
        stdout
            .write_all(format!("Asistan: {}\n", answer).as_bytes())
            .await?;
    }

    stdout.write_all("Görüşmek üzere!\n".as_bytes()).await?;
    Ok(())
}
