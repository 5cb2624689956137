//! Avatar upload widget state
//!
//! [`ChangeAvatar`] tracks the state behind a "change avatar" control:
//!
//! ```text
//! Display --file selected--> Uploading --ok--> Display (new URL)
//!                                      \--err--> Error (message set)
//! ```
//!
//! Once the user has picked a file the widget stops accepting avatar URLs
//! pushed from outside, so a stale room or profile update cannot overwrite
//! the image that was just uploaded.

use crate::error::{AvatarError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Message shown when any step of the upload fails
pub const UPLOAD_FAILED_TEXT: &str = "Failed to upload profile picture!";

/// Media repository and profile/room state the widget writes to
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Upload `file`, returning its content URI (`mxc://...`)
    async fn upload(&self, file: &AvatarFile) -> Result<String>;

    /// Set the avatar of `room_id` to `content_uri`
    async fn set_room_avatar(&self, room_id: &str, content_uri: &str) -> Result<()>;

    /// Set the signed-in user's avatar to `content_uri`
    async fn set_user_avatar(&self, content_uri: &str) -> Result<()>;

    /// HTTP URL a content URI can be displayed from
    fn mxc_to_http(&self, content_uri: &str) -> Option<String>;
}

/// Build the download URL for a `mxc://server/media_id` URI on `homeserver`
///
/// Returns `None` for anything that is not a well-formed content URI.
///
/// # Examples
///
/// ```
/// use rageshake::avatar::mxc_to_http;
///
/// let hs = url::Url::parse("https://matrix.example.org").unwrap();
/// assert_eq!(
///     mxc_to_http(&hs, "mxc://example.org/abc123").as_deref(),
///     Some("https://matrix.example.org/_matrix/media/r0/download/example.org/abc123"),
/// );
/// assert!(mxc_to_http(&hs, "https://example.org/a.png").is_none());
/// ```
pub fn mxc_to_http(homeserver: &url::Url, content_uri: &str) -> Option<String> {
    let rest = content_uri.strip_prefix("mxc://")?;
    let (server, media_id) = rest.split_once('/')?;
    if server.is_empty() || media_id.is_empty() || media_id.contains('/') {
        return None;
    }
    let base = homeserver.as_str().trim_end_matches('/');
    Some(format!(
        "{}/_matrix/media/r0/download/{}/{}",
        base, server, media_id
    ))
}

/// A file picked by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarFile {
    /// File name as picked
    pub name: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    /// Create a file
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Whether the content type is `image/*`
    pub fn is_image(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("image/")
    }
}

/// What the avatar belongs to
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AvatarTarget {
    /// The signed-in user
    #[default]
    User,
    /// A room
    Room(String),
    /// A group; uploads are reported through `on_avatar` but never applied
    Group(String),
}

/// Widget phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvatarPhase {
    /// Showing the current avatar
    Display,
    /// Upload in flight
    Uploading,
    /// Last upload failed
    Error,
}

/// Events broadcast by [`ChangeAvatar`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarEvent {
    /// The widget changed phase
    PhaseChanged {
        /// New phase
        phase: AvatarPhase,
    },
    /// A new avatar was uploaded (and applied, when configured)
    AvatarChanged {
        /// Content URI of the upload
        content_uri: String,
    },
}

/// Callback receiving the content URI of a finished upload
#[derive(Clone)]
pub struct AvatarCallback(Arc<dyn Fn(&str) + Send + Sync>);

impl AvatarCallback {
    /// Wrap a closure
    pub fn new(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for AvatarCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AvatarCallback")
    }
}

/// Widget options
#[derive(Clone, Debug)]
pub struct ChangeAvatarProps {
    /// What the avatar belongs to
    pub target: AvatarTarget,
    /// Avatar URL to show before anything is uploaded
    pub initial_avatar_url: Option<String>,
    /// Apply the upload as the room/user avatar (default: true)
    pub set_avatar: bool,
    /// Show the file picker (default: true)
    pub show_upload_section: bool,
    /// Display width in pixels (default: 80)
    pub width: u32,
    /// Display height in pixels (default: 80)
    pub height: u32,
    /// Called with the content URI after a successful upload
    pub on_avatar: Option<AvatarCallback>,
}

impl Default for ChangeAvatarProps {
    fn default() -> Self {
        Self {
            target: AvatarTarget::default(),
            initial_avatar_url: None,
            set_avatar: true,
            show_upload_section: true,
            width: 80,
            height: 80,
            on_avatar: None,
        }
    }
}

/// Image part of an [`AvatarView`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarImage {
    /// The room's own avatar
    Room {
        /// Room whose avatar is shown
        room_id: String,
    },
    /// The group's avatar
    Group {
        /// Group whose avatar is shown
        group_id: String,
        /// Group avatar URL
        url: Option<String>,
    },
    /// A plain avatar image
    Url(Option<String>),
}

/// What the widget should currently display
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarView {
    /// Upload in progress
    Spinner,
    /// Avatar, optionally with the upload section
    Avatar {
        /// Image to show
        image: AvatarImage,
        /// Display width
        width: u32,
        /// Display height
        height: u32,
        /// Upload section, with the last error if any
        upload_section: Option<Option<String>>,
    },
}

/// State machine behind a "change avatar" control
pub struct ChangeAvatar {
    repo: Arc<dyn MediaRepository>,
    props: ChangeAvatarProps,
    phase: AvatarPhase,
    avatar_url: Option<String>,
    error_text: Option<String>,
    avatar_set: bool,
    event_tx: broadcast::Sender<AvatarEvent>,
}

impl ChangeAvatar {
    /// Create a widget in the Display phase showing `props.initial_avatar_url`
    pub fn new(repo: Arc<dyn MediaRepository>, props: ChangeAvatarProps) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            repo,
            avatar_url: props.initial_avatar_url.clone(),
            props,
            phase: AvatarPhase::Display,
            error_text: None,
            avatar_set: false,
            event_tx,
        }
    }

    /// Subscribe to phase and avatar changes
    pub fn subscribe(&self) -> broadcast::Receiver<AvatarEvent> {
        self.event_tx.subscribe()
    }

    /// Current phase
    pub fn phase(&self) -> AvatarPhase {
        self.phase
    }

    /// URL of the avatar currently shown
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Error message from the last failed upload
    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    /// Whether the user has picked a file during this widget's lifetime
    pub fn avatar_set(&self) -> bool {
        self.avatar_set
    }

    /// Accept a new avatar URL from outside (e.g. a profile update)
    ///
    /// Ignored once the user has picked a file, and while not in Display.
    pub fn update_initial_avatar_url(&mut self, url: Option<String>) {
        self.props.initial_avatar_url = url.clone();
        if self.avatar_set || self.phase != AvatarPhase::Display {
            return;
        }
        self.avatar_url = url;
    }

    /// Handle a file picked by the user
    ///
    /// From now on, outside avatar URL updates are ignored.
    pub async fn on_file_selected(&mut self, file: AvatarFile) -> Result<()> {
        self.avatar_set = true;
        self.set_avatar_from_file(file).await
    }

    /// Upload `file` and apply it as the avatar
    ///
    /// On failure the widget moves to Error with [`UPLOAD_FAILED_TEXT`] and the
    /// cause is returned.
    pub async fn set_avatar_from_file(&mut self, file: AvatarFile) -> Result<()> {
        self.error_text = None;
        self.set_phase(AvatarPhase::Uploading);

        match self.upload_and_apply(&file).await {
            Ok(content_uri) => {
                self.avatar_url = self.repo.mxc_to_http(&content_uri);
                info!(content_uri = %content_uri, "avatar updated");
                self.event_tx
                    .send(AvatarEvent::AvatarChanged { content_uri })
                    .ok();
                self.set_phase(AvatarPhase::Display);
                Ok(())
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "avatar upload failed");
                self.error_text = Some(UPLOAD_FAILED_TEXT.to_string());
                self.set_phase(AvatarPhase::Error);
                Err(e.into())
            }
        }
    }

    async fn upload_and_apply(&self, file: &AvatarFile) -> std::result::Result<String, AvatarError> {
        if !file.is_image() {
            return Err(AvatarError::NotAnImage {
                file_name: file.name.clone(),
                content_type: file.content_type.clone(),
            });
        }

        let content_uri = self
            .repo
            .upload(file)
            .await
            .map_err(|e| AvatarError::Upload {
                source: Box::new(e),
            })?;

        if let Some(on_avatar) = &self.props.on_avatar {
            (on_avatar.0)(&content_uri);
        }

        if self.props.set_avatar {
            let applied = match &self.props.target {
                AvatarTarget::Room(room_id) => {
                    Some(self.repo.set_room_avatar(room_id, &content_uri).await)
                }
                AvatarTarget::User => Some(self.repo.set_user_avatar(&content_uri).await),
                AvatarTarget::Group(_) => None,
            };
            if let Some(Err(e)) = applied {
                return Err(AvatarError::Apply {
                    source: Box::new(e),
                });
            }
        }

        Ok(content_uri)
    }

    fn set_phase(&mut self, phase: AvatarPhase) {
        self.phase = phase;
        self.event_tx.send(AvatarEvent::PhaseChanged { phase }).ok();
    }

    /// What should be displayed right now
    pub fn view(&self) -> AvatarView {
        if self.phase == AvatarPhase::Uploading {
            return AvatarView::Spinner;
        }

        // A freshly uploaded room avatar takes a while to reach the room state,
        // so show the uploaded URL instead of the room's.
        let image = match &self.props.target {
            AvatarTarget::Room(room_id) if !self.avatar_set => AvatarImage::Room {
                room_id: room_id.clone(),
            },
            AvatarTarget::Group(group_id) => AvatarImage::Group {
                group_id: group_id.clone(),
                url: self.props.initial_avatar_url.clone(),
            },
            _ => AvatarImage::Url(self.avatar_url.clone()),
        };

        AvatarView::Avatar {
            image,
            width: self.props.width,
            height: self.props.height,
            upload_section: self
                .props
                .show_upload_section
                .then(|| self.error_text.clone()),
        }
    }
}

impl fmt::Debug for ChangeAvatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeAvatar")
            .field("target", &self.props.target)
            .field("phase", &self.phase)
            .field("avatar_url", &self.avatar_url)
            .field("avatar_set", &self.avatar_set)
            .finish_non_exhaustive()
    }
}
