mod playlist;
mod song;
mod user;

pub use playlist::{PlaylistDetail, PlaylistEntry, PlaylistSummary};
pub use song::{
    parse_tags, split_by_feedback, NewSong, RatedSong, Song, SongFilter, SongTitle, TAG_SEPARATOR,
};
pub use user::{normalize_name, User, MAX_NAME_LEN};
