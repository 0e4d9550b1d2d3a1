//! Interactive chat shell
//!
//! Runs the readline loop: authenticates (resuming a stored session when
//! possible), then alternates between draining server events and reading
//! user input. The line editor runs on a blocking task so that typing
//! activity, the typing-indicator deadline, and the periodic roster
//! refresh are serviced while the user composes. Slash commands drive the
//! client; anything else is sent to the active conversation.

use crate::api::{CitySearchClient, ProfileClient, UploadClient};
use crate::auth::{self, LoginFields, StoredSession, TokenStore};
use crate::client::{Client, Notice};
use crate::commands::special::{parse_slash_command, print_help, SlashCommand};
use crate::config::Config;
use crate::connection::{Connection, TcpConnection};
use crate::error::{PalaverError, Result};
use crate::roster::{format_distance, truncate_label, RosterFilter};
use crate::session::{Message, MessageKind, SessionKind};
use crate::types::{City, Gender, User};
use colored::Colorize;
use prettytable::{row, Table};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// How long `/rooms` and `/users` wait for the server's reply
const SYNC_WAIT: Duration = Duration::from_secs(2);

/// How often background work runs while the prompt is blocked
const TICK: Duration = Duration::from_millis(250);

type ChatEditor = Editor<TypingNotifier, DefaultHistory>;

/// Login fields that can be pre-filled from the command line
#[derive(Debug, Default, Clone)]
pub struct LoginArgs {
    pub nickname: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<String>,
    pub city: Option<String>,
}

/// Rustyline helper that reports edit activity
///
/// Rustyline refreshes hints on every edit, so the hint callback doubles
/// as a keystroke notification for the typing tracker.
struct TypingNotifier {
    keys: mpsc::UnboundedSender<Instant>,
}

impl TypingNotifier {
    fn new(keys: mpsc::UnboundedSender<Instant>) -> Self {
        Self { keys }
    }

    fn notify(&self) {
        // receiver gone means the shell is exiting
        let _ = self.keys.send(Instant::now());
    }
}

impl Hinter for TypingNotifier {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.notify();
        None
    }
}

impl Completer for TypingNotifier {
    type Candidate = String;
}

impl Highlighter for TypingNotifier {}
impl Validator for TypingNotifier {}
impl Helper for TypingNotifier {}

/// Tracks when the next automatic roster refresh is owed
///
/// A zero interval disables automatic refreshes.
struct RefreshTimer {
    interval: Duration,
    last: Instant,
}

impl RefreshTimer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    fn due(&mut self, now: Instant) -> bool {
        if self.interval.is_zero() {
            return false;
        }
        if now.duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

/// Start the interactive chat shell
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `args` - Login fields given on the command line; missing ones are
///   prompted for
/// * `fresh` - Ignore any stored session token and log in from scratch
pub async fn run_chat(config: Config, args: LoginArgs, fresh: bool) -> Result<()> {
    tracing::info!("Starting interactive chat shell");

    let (key_tx, mut keys) = mpsc::unbounded_channel();
    let mut rl: ChatEditor = Editor::new()
        .map_err(|e| PalaverError::Config(format!("failed to initialize readline: {}", e)))?;
    rl.set_helper(Some(TypingNotifier::new(key_tx)));

    let mut conn = TcpConnection::connect(&config.server.realtime_addr).await?;

    let store = TokenStore::new();
    let auth = authenticate(&mut conn, &mut rl, &config, &args, fresh, &store).await?;
    store.save(&StoredSession {
        token: auth.token.clone(),
        user_id: auth.user.id.clone(),
        nickname: auth.user.nickname.clone(),
    })?;

    println!(
        "Welcome, {}! Type {} for commands.\n",
        auth.user.nickname.green().bold(),
        "/help".cyan()
    );

    let mut client = Client::new(
        auth.user,
        Box::new(conn),
        &config.chat.home_label,
        Duration::from_secs(config.chat.typing_idle_seconds),
    );
    client.announce_online().await?;

    let upload = UploadClient::new(&config.server)?;
    let profile = ProfileClient::new(&config.server)?;
    let mut roster_timer =
        RefreshTimer::new(Duration::from_secs(config.chat.roster_refresh_seconds));

    // login prompts also produce keystroke notifications; discard them
    while keys.try_recv().is_ok() {}

    // messages already printed, per session key
    let mut printed: HashMap<String, usize> = HashMap::new();

    loop {
        client.poll_typing(Instant::now()).await?;
        for notice in client.drain_events().await? {
            print_notice(&notice);
        }
        print_new_messages(&client, &mut printed);

        let prompt = format!("[{}] > ", client.registry().active().display_label());
        let (result, editor) = read_line(rl, prompt, &mut client, &mut keys, &mut roster_timer).await?;
        rl = editor;

        let line = match result {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                return Err(PalaverError::Config(format!("readline error: {}", e)).into())
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        let command = match parse_slash_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        match command {
            SlashCommand::Quit => break,
            SlashCommand::Help => print_help(),
            SlashCommand::Rooms => {
                for notice in client.sync_rooms(SYNC_WAIT).await? {
                    print_notice(&notice);
                }
                print_rooms(&client);
            }
            SlashCommand::Users => {
                for notice in client.sync_roster(SYNC_WAIT).await? {
                    print_notice(&notice);
                }
                print_users(&client);
            }
            SlashCommand::Join(name) => match client.rooms().find_by_name(&name).cloned() {
                Some(room) => {
                    client.join_room(&room).await?;
                    println!("Joined {}", room.name.green());
                }
                None => println!("{}", format!("No room named '{}'", name).red()),
            },
            SlashCommand::Msg(nickname) => {
                match client.roster().find_by_nickname(&nickname).cloned() {
                    Some(user) => client.open_private(&user),
                    None => println!("{}", format!("No online user named '{}'", nickname).red()),
                }
            }
            SlashCommand::Tabs => print_tabs(&client),
            SlashCommand::Tab(selector) => match resolve_tab_key(&client, &selector) {
                Some(key) => client.focus(&key),
                None => println!("{}", format!("No tab '{}'", selector).red()),
            },
            SlashCommand::Close(selector) => {
                let key = match &selector {
                    None => Some(client.registry().active_key().to_string()),
                    Some(s) => resolve_tab_key(&client, s),
                };
                match key {
                    Some(key) => client.close_session(&key).await?,
                    None => println!(
                        "{}",
                        format!("No tab '{}'", selector.unwrap_or_default()).red()
                    ),
                }
            }
            SlashCommand::SendFile(path) => match upload.upload(&path).await {
                Ok(url) => {
                    let result = match client.registry().active().kind {
                        SessionKind::Room => client.send_room_message(None, Some(url)).await,
                        _ => client.send_private(None, Some(url)).await,
                    };
                    if let Err(e) = result {
                        println!("{}", e.to_string().red());
                    }
                }
                Err(e) => println!("{}", format!("Upload failed: {}", e).red()),
            },
            SlashCommand::CreateRoom { name, visibility } => {
                client.create_room(&name, visibility).await?;
            }
            SlashCommand::Profile(nickname) => {
                let user_id = match &nickname {
                    None => Some(client.user().id.clone()),
                    Some(nick) => client.roster().find_by_nickname(nick).map(|u| u.id.clone()),
                };
                match user_id {
                    Some(id) => match profile.get(&id).await {
                        Ok(p) => {
                            println!("bio:    {}", p.bio.as_deref().unwrap_or("-"));
                            println!("avatar: {}", p.avatar_url.as_deref().unwrap_or("-"));
                        }
                        Err(e) => println!("{}", format!("Profile lookup failed: {}", e).red()),
                    },
                    None => println!(
                        "{}",
                        format!("No online user named '{}'", nickname.unwrap_or_default()).red()
                    ),
                }
            }
            SlashCommand::Filter { gender, age_band } => {
                client.set_filter(RosterFilter { gender, age_band });
                print_users(&client);
            }
            SlashCommand::Server(raw) => {
                if let Err(e) = client.send_room_command(&raw).await {
                    println!("{}", e.to_string().red());
                }
            }
            SlashCommand::None => {
                let result = match client.registry().active().kind {
                    SessionKind::Home => {
                        println!(
                            "{}",
                            "Open a conversation first: /join <room> or /msg <nickname>".yellow()
                        );
                        Ok(())
                    }
                    SessionKind::Room => {
                        client.send_room_message(Some(trimmed.to_string()), None).await
                    }
                    SessionKind::Private => {
                        client.send_private(Some(trimmed.to_string()), None).await
                    }
                };
                if let Err(e) = result {
                    println!("{}", e.to_string().red());
                }
            }
        }
    }

    client.shutdown().await?;
    println!("Goodbye.");
    Ok(())
}

/// Read one line while servicing background work
///
/// The editor blocks a dedicated task; meanwhile keystroke notifications
/// feed the typing tracker, the idle deadline is polled, and the roster is
/// refreshed on schedule.
async fn read_line(
    rl: ChatEditor,
    prompt: String,
    client: &mut Client,
    keys: &mut mpsc::UnboundedReceiver<Instant>,
    roster_timer: &mut RefreshTimer,
) -> Result<(std::result::Result<String, ReadlineError>, ChatEditor)> {
    let mut rl = rl;
    let mut task = tokio::task::spawn_blocking(move || {
        let result = rl.readline(&prompt);
        (result, rl)
    });

    loop {
        tokio::select! {
            joined = &mut task => {
                return joined
                    .map_err(|e| PalaverError::Config(format!("readline task failed: {}", e)).into());
            }
            Some(at) = keys.recv() => {
                client.keystroke(at).await?;
            }
            _ = tokio::time::sleep(TICK) => {
                client.poll_typing(Instant::now()).await?;
                if roster_timer.due(Instant::now()) {
                    client.refresh_roster().await?;
                }
            }
        }
    }
}

/// Authenticate against the realtime server
///
/// Tries the stored token first (unless `fresh`), then falls back to a
/// fresh login with prompted fields.
async fn authenticate(
    conn: &mut dyn Connection,
    rl: &mut ChatEditor,
    config: &Config,
    args: &LoginArgs,
    fresh: bool,
    store: &TokenStore,
) -> Result<auth::Authenticated> {
    if !fresh {
        if let Some(stored) = store.load()? {
            if let Some(auth) = auth::resume(conn, &stored.token).await? {
                return Ok(auth);
            }
            store.clear()?;
        }
    }
    let fields = prompt_login_fields(rl, config, args).await?;
    auth::login(conn, &fields).await
}

async fn prompt_login_fields(
    rl: &mut ChatEditor,
    config: &Config,
    args: &LoginArgs,
) -> Result<LoginFields> {
    let nickname = match &args.nickname {
        Some(n) => n.clone(),
        None => prompt(rl, "Nickname: ")?,
    };
    let age = match args.age {
        Some(a) => a,
        None => prompt(rl, "Age: ")?
            .parse()
            .map_err(|_| PalaverError::validation("age", "must be a number"))?,
    };
    let gender = match args.gender.as_deref() {
        Some(g) => parse_gender(g)?,
        None => parse_gender(&prompt(rl, "Gender (man/woman): ")?)?,
    };
    let query = match &args.city {
        Some(c) => c.clone(),
        None => prompt(rl, "City: ")?,
    };
    let city = pick_city(rl, config, &query).await?;

    Ok(LoginFields {
        nickname,
        gender,
        age,
        city,
    })
}

/// Resolve a free-text city query to one municipality, asking the user to
/// pick when several match
async fn pick_city(rl: &mut ChatEditor, config: &Config, query: &str) -> Result<City> {
    let candidates = CitySearchClient::new(&config.server)?.search(query).await?;
    match candidates.len() {
        0 => Err(PalaverError::validation("city", "no matching municipality").into()),
        1 => Ok(candidates.into_iter().next().unwrap_or_default()),
        _ => {
            for (i, city) in candidates.iter().enumerate() {
                println!("  {}. {} ({})", i + 1, city.name, city.code);
            }
            let choice: usize = prompt(rl, "Pick a city: ")?
                .parse()
                .map_err(|_| PalaverError::validation("city", "must be a number"))?;
            candidates
                .into_iter()
                .nth(choice.wrapping_sub(1))
                .ok_or_else(|| PalaverError::validation("city", "choice out of range").into())
        }
    }
}

fn prompt(rl: &mut ChatEditor, label: &str) -> Result<String> {
    match rl.readline(label) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            Err(PalaverError::Auth("login aborted".to_string()).into())
        }
        Err(e) => Err(PalaverError::Config(format!("readline error: {}", e)).into()),
    }
}

fn parse_gender(input: &str) -> Result<Gender> {
    match input.trim().to_lowercase().as_str() {
        "man" | "m" => Ok(Gender::Man),
        "woman" | "w" | "f" => Ok(Gender::Woman),
        other => {
            Err(PalaverError::validation("gender", format!("unknown gender '{}'", other)).into())
        }
    }
}

/// Resolve `/tab` input to a session key: a 1-based position or a key
fn resolve_tab_key(client: &Client, selector: &str) -> Option<String> {
    let keys = client.registry().keys();
    if let Ok(index) = selector.parse::<usize>() {
        return keys.get(index.wrapping_sub(1)).map(|k| k.to_string());
    }
    keys.iter()
        .find(|k| k.eq_ignore_ascii_case(selector))
        .map(|k| k.to_string())
}

fn print_notice(notice: &Notice) {
    match notice {
        Notice::Info(text) => println!("{}", text.yellow()),
        Notice::RoomClosed { room_id, reason } => {
            println!("{}", format!("Left room {}: {}", room_id, reason).yellow())
        }
    }
}

/// Print messages of the active session that have not been shown yet
fn print_new_messages(client: &Client, printed: &mut HashMap<String, usize>) {
    let session = client.registry().active();
    let seen = printed.entry(session.key.clone()).or_insert(0);
    for message in session.messages.iter().skip(*seen) {
        print_message(client.user(), message);
    }
    *seen = session.messages.len();
}

fn print_message(me: &User, message: &Message) {
    let time = message.sent_at.format("%H:%M");
    let who = if message.kind == MessageKind::System {
        "server".yellow()
    } else if message.sender.id == me.id {
        "you".green()
    } else {
        message.sender.nickname.cyan()
    };
    match (&message.content, &message.attachment_url) {
        (Some(text), Some(url)) => println!("{} {}: {} [{}]", time, who, text, url),
        (Some(text), None) => println!("{} {}: {}", time, who, text),
        (None, Some(url)) => println!("{} {}: [{}]", time, who, url),
        (None, None) => {}
    }
}

fn print_tabs(client: &Client) {
    let active = client.registry().active_key();
    for (i, session) in client.registry().sessions().iter().enumerate() {
        let marker = if session.key == active { "*" } else { " " };
        println!("{} {}. {}", marker, i + 1, session.display_label());
    }
}

fn print_users(client: &Client) {
    let mut table = Table::new();
    table.add_row(row!["Nickname", "Gender", "Age", "Distance", "Status"]);
    for entry in client.roster().filtered(client.filter()) {
        table.add_row(row![
            truncate_label(&entry.user.nickname, 24),
            entry.user.gender,
            entry.user.age,
            format_distance(entry.distance),
            entry.status,
        ]);
    }
    table.printstd();
}

fn print_rooms(client: &Client) {
    let mut table = Table::new();
    table.add_row(row!["Room", "Visibility"]);
    for room in client.rooms().rooms() {
        table.add_row(row![truncate_label(&room.name, 32), room_visibility(room)]);
    }
    table.printstd();
}

fn room_visibility(room: &crate::types::Room) -> &'static str {
    match room.visibility {
        crate::types::RoomVisibility::Public => "public",
        crate::types::RoomVisibility::Private => "private",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ChannelConnection, ClientCommand};
    use crate::types::Room;

    fn client() -> (Client, crate::connection::ChannelPeer) {
        let (conn, peer) = ChannelConnection::pair();
        let client = Client::new(
            User::new("me", "self"),
            Box::new(conn),
            "Home",
            Duration::from_secs(3),
        );
        (client, peer)
    }

    #[test]
    fn test_parse_gender_aliases() {
        assert_eq!(parse_gender("man").unwrap(), Gender::Man);
        assert_eq!(parse_gender("M").unwrap(), Gender::Man);
        assert_eq!(parse_gender("Woman").unwrap(), Gender::Woman);
        assert!(parse_gender("other").is_err());
    }

    #[tokio::test]
    async fn test_resolve_tab_key_by_position() {
        let (mut client, _peer) = client();
        client.join_room(&Room::public("r1", "General")).await.unwrap();
        client.open_private(&User::new("u1", "ana"));

        assert_eq!(resolve_tab_key(&client, "1"), Some("home".to_string()));
        assert_eq!(resolve_tab_key(&client, "3"), Some("u1".to_string()));
        assert_eq!(resolve_tab_key(&client, "4"), None);
        assert_eq!(resolve_tab_key(&client, "0"), None);
    }

    #[tokio::test]
    async fn test_resolve_tab_key_by_key() {
        let (mut client, _peer) = client();
        client.join_room(&Room::public("r1", "General")).await.unwrap();
        assert_eq!(resolve_tab_key(&client, "R1"), Some("r1".to_string()));
        assert_eq!(resolve_tab_key(&client, "nope"), None);
    }

    #[tokio::test]
    async fn test_print_new_messages_tracks_per_session() {
        let (mut client, _peer) = client();
        client.open_private(&User::new("u1", "ana"));
        client
            .send_private(Some("one".to_string()), None)
            .await
            .unwrap();

        let mut printed = HashMap::new();
        print_new_messages(&client, &mut printed);
        assert_eq!(printed.get("u1"), Some(&1));

        client
            .send_private(Some("two".to_string()), None)
            .await
            .unwrap();
        print_new_messages(&client, &mut printed);
        assert_eq!(printed.get("u1"), Some(&2));
    }

    #[test]
    fn test_typing_notifier_reports_keystrokes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let helper = TypingNotifier::new(tx);
        helper.notify();
        helper.notify();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_keystroke_notifications_drive_the_typing_tracker() {
        let (conn, mut peer) = ChannelConnection::pair();
        let mut client = Client::new(
            User::new("me", "self"),
            Box::new(conn),
            "Home",
            Duration::from_secs(3),
        );
        client.open_private(&User::new("u1", "ana"));

        let (tx, mut keys) = mpsc::unbounded_channel();
        let helper = TypingNotifier::new(tx);
        helper.notify();
        helper.notify();
        while let Ok(at) = keys.try_recv() {
            client.keystroke(at).await.unwrap();
        }

        // one burst, one typing announcement
        assert!(matches!(
            peer.recv().await,
            Some(ClientCommand::Typing { recipient_id }) if recipient_id == "u1"
        ));
        assert!(peer.try_recv().is_none());
    }

    #[test]
    fn test_refresh_timer_fires_after_interval() {
        let mut timer = RefreshTimer::new(Duration::from_secs(60));
        let start = timer.last;
        assert!(!timer.due(start + Duration::from_secs(59)));
        assert!(timer.due(start + Duration::from_secs(60)));
        // firing re-arms the interval
        assert!(!timer.due(start + Duration::from_secs(61)));
        assert!(timer.due(start + Duration::from_secs(120)));
    }

    #[test]
    fn test_refresh_timer_zero_interval_is_disabled() {
        let mut timer = RefreshTimer::new(Duration::ZERO);
        let start = timer.last;
        assert!(!timer.due(start + Duration::from_secs(3600)));
    }
}
