// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Interactive session: one `Hub` and one `SessionClient` for as long as
//! the shell runs, driven by line commands.

use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::form::FieldEvent;
use crate::hub::Hub;
use crate::ingest::UploadFile;
use crate::render::{Notice, Renderer, Slot};
use crate::session::SessionClient;
use crate::source::{RemoteSource, SessionApi};

pub const HELP: &str = "\
Commands:
  doi <value>              set the DOI field
  blur                     leave the DOI field (validates it)
  title <text>             set the title
  protein <text>           set the protein type
  hardness on|off          gel hardness flag
  whc on|off               water holding capacity flag
  form                     show the form
  check      (^enter)      check the form's DOI for duplicates
  upload <file>            upload a CSV file
  stats      (^s)          show statistics
  export     (^d)          download the database as CSV
  register <email> <pw>    create an account
  login <email> <pw>       log in
  logout [email]           log out
  users                    list active users
  list                     show uploaded and saved DOIs
  clear                    forget all local data
  help                     this text
  quit                     leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Doi(String),
    Blur,
    Title(String),
    Protein(String),
    Hardness(bool),
    Whc(bool),
    ShowForm,
    Check,
    Upload(Option<PathBuf>),
    Stats,
    Export,
    Register { email: String, password: String },
    Login { email: String, password: String },
    Logout(Option<String>),
    Users,
    List,
    Clear,
    Help,
    Quit,
    Empty,
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(format!("expected on/off, got '{}'", other)),
    }
}

fn credentials(rest: &str) -> Result<(String, String), String> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(email), Some(password)) => Ok((email.to_string(), password.to_string())),
        _ => Err("usage: <email> <password>".to_string()),
    }
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => ShellCommand::Empty,
            "doi" => ShellCommand::Doi(rest.to_string()),
            "blur" => ShellCommand::Blur,
            "title" => ShellCommand::Title(rest.to_string()),
            "protein" => ShellCommand::Protein(rest.to_string()),
            "hardness" => ShellCommand::Hardness(parse_switch(rest)?),
            "whc" => ShellCommand::Whc(parse_switch(rest)?),
            "form" => ShellCommand::ShowForm,
            "check" | "^enter" => ShellCommand::Check,
            "upload" if rest.is_empty() => ShellCommand::Upload(None),
            "upload" => ShellCommand::Upload(Some(PathBuf::from(rest))),
            "stats" | "^s" => ShellCommand::Stats,
            "export" | "^d" => ShellCommand::Export,
            "register" => {
                let (email, password) = credentials(rest)?;
                ShellCommand::Register { email, password }
            }
            "login" => {
                let (email, password) = credentials(rest)?;
                ShellCommand::Login { email, password }
            }
            "logout" if rest.is_empty() => ShellCommand::Logout(None),
            "logout" => ShellCommand::Logout(Some(rest.to_string())),
            "users" => ShellCommand::Users,
            "list" => ShellCommand::List,
            "clear" => ShellCommand::Clear,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(command)
    }
}

pub struct Shell<R: RemoteSource, S: SessionApi, V: Renderer> {
    hub: Hub<R, V>,
    session: SessionClient<S>,
}

impl<R: RemoteSource, S: SessionApi, V: Renderer> Shell<R, S, V> {
    pub fn new(hub: Hub<R, V>, session: SessionClient<S>) -> Self {
        Self { hub, session }
    }

    pub fn hub(&self) -> &Hub<R, V> {
        &self.hub
    }

    pub fn session(&self) -> &SessionClient<S> {
        &self.session
    }

    /// What the page did on load: statistics and the active-user list.
    pub async fn start(&mut self) {
        self.hub.show_stats().await;
        self.session.refresh_active_users(self.hub.renderer_mut()).await;
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run<I>(&mut self, input: I) -> std::io::Result<()>
    where
        I: AsyncBufRead + Unpin,
    {
        self.start().await;
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match ShellCommand::parse(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => self.dispatch(command).await,
                Err(message) => self
                    .hub
                    .renderer_mut()
                    .notice(Notice::error(Slot::Response, message)),
            }
        }
        Ok(())
    }

    /// Runs one command. Failures have already been rendered by the
    /// handler, so they are only logged here.
    pub async fn dispatch(&mut self, command: ShellCommand) {
        debug!("Shell command: {:?}", command);
        let result = match command {
            ShellCommand::Doi(value) => {
                self.hub.doi_event(FieldEvent::Focus);
                self.hub.form_mut().doi = value;
                self.hub.doi_event(FieldEvent::Input);
                Ok(())
            }
            ShellCommand::Blur => {
                self.hub.doi_event(FieldEvent::Blur);
                Ok(())
            }
            ShellCommand::Title(value) => {
                self.hub.form_mut().title = value;
                Ok(())
            }
            ShellCommand::Protein(value) => {
                self.hub.form_mut().protein = value;
                Ok(())
            }
            ShellCommand::Hardness(on) => {
                self.hub.form_mut().hardness = on;
                Ok(())
            }
            ShellCommand::Whc(on) => {
                self.hub.form_mut().whc = on;
                Ok(())
            }
            ShellCommand::ShowForm => {
                let form = self.hub.form().clone();
                self.info(format!(
                    "DOI: {}\nTitle: {}\nProtein: {}\nHardness: {}\nWHC: {}",
                    form.doi, form.title, form.protein, form.hardness, form.whc
                ));
                Ok(())
            }
            ShellCommand::Check => self.hub.check_duplicate().await.map(|_| ()),
            ShellCommand::Upload(path) => {
                let file = match path {
                    Some(path) => match UploadFile::read(&path).await {
                        Ok(file) => Some(file),
                        Err(e) => {
                            self.hub
                                .renderer_mut()
                                .notice(Notice::error(Slot::FileResponse, format!("Upload Error: {}", e)));
                            return;
                        }
                    },
                    None => None,
                };
                self.hub.upload_file(file).await.map(|_| ())
            }
            ShellCommand::Stats => {
                self.hub.show_stats().await;
                Ok(())
            }
            ShellCommand::Export => self.hub.download_database().await.map(|_| ()),
            ShellCommand::Register { email, password } => {
                self.session
                    .register(&email, &password, self.hub.renderer_mut())
                    .await
            }
            ShellCommand::Login { email, password } => self
                .session
                .login(&email, &password, self.hub.renderer_mut())
                .await
                .map(|_| ()),
            ShellCommand::Logout(email) => {
                self.session
                    .logout(email.as_deref(), self.hub.renderer_mut())
                    .await
            }
            ShellCommand::Users => {
                self.session.refresh_active_users(self.hub.renderer_mut()).await;
                Ok(())
            }
            ShellCommand::List => {
                let state = self.hub.state();
                let uploaded: Vec<&str> = state.uploaded().records().iter().map(|r| r.doi.as_str()).collect();
                let saved: Vec<&str> = state.saved().iter().map(|r| r.doi.as_str()).collect();
                let text = format!(
                    "Uploaded ({}): {}\nSaved ({}): {}",
                    uploaded.len(),
                    uploaded.join(", "),
                    saved.len(),
                    saved.join(", ")
                );
                self.info(text);
                Ok(())
            }
            ShellCommand::Clear => {
                self.hub.clear_all();
                Ok(())
            }
            ShellCommand::Help => {
                self.info(HELP.to_string());
                Ok(())
            }
            ShellCommand::Quit | ShellCommand::Empty => Ok(()),
        };

        if let Err(e) = result {
            debug!("Command failed: {}", e);
        }
    }

    fn info(&mut self, text: String) {
        self.hub.renderer_mut().notice(Notice::info(Slot::Response, text));
    }
}
