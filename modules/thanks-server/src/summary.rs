//! Weekly tallies and the reply posted under each mention.

use std::fmt::Write;

use thanks_store::{Recipient, ThankRecord};

/// Thanks `sender` has given within `window`.
pub fn thanks_sent(window: &[ThankRecord], sender: &str) -> usize {
    window.iter().filter(|row| row.sender == sender).count()
}

/// Thanks `recipient` has received within `window`.
pub fn thanks_received(window: &[ThankRecord], recipient: &str) -> usize {
    window.iter().filter(|row| row.recipient == recipient).count()
}

/// Compose the reply for one mention from the post-insert weekly window.
pub fn compose_summary(sender: &str, recipients: &[Recipient], window: &[ThankRecord]) -> String {
    let mut summary = String::from("Obrigado recebido!\n");
    let _ = writeln!(
        summary,
        "@[{sender}] enviou {} obrigados em 1 semana.",
        thanks_sent(window, sender)
    );

    for recipient in recipients {
        let received = thanks_received(window, &recipient.id);
        if recipient.has_manager() {
            let _ = writeln!(
                summary,
                "@[{}] recebeu {received} obrigados em 1 semana. Olha só @[{}]!",
                recipient.id, recipient.manager
            );
        } else {
            let _ = writeln!(
                summary,
                "@[{}] recebeu {received} obrigados em 1 semana. Infelizmente não sei quem é o seu líder :(",
                recipient.id
            );
        }
    }

    summary
}
