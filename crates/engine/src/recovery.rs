//! Cold-start recovery: creating the journal file if needed, reading (or
//! writing) the header, and replaying every existing record into a fresh
//! [`Index`] before the writer thread is spawned.

use std::fs::{File, OpenOptions as StdOpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use config::OpenOptions;
use index::Index;
use journal::Header;
use serializer::Serializer;

use crate::{read, registry, write, DbError, Inner, State};

/// Opens (or creates) the journal at `path` and spawns its writer thread.
pub(crate) fn open<T, S>(
    path: &Path,
    serializer: S,
    options: OpenOptions<T>,
) -> Result<crate::Database<T, S>, DbError>
where
    T: Send + Sync + 'static,
    S: Serializer<T> + 'static,
{
    let format_name = serializer.format_name();

    if !path.exists() {
        if !options.create_if_missing {
            return Err(DbError::FileMissing(path.to_path_buf()));
        }
        let mut f = StdOpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Header::new(format_name).write(&mut f)?;
        f.sync_all()?;
    }

    let out = StdOpenOptions::new().create(true).append(true).open(path)?;
    let mut infile = File::open(path)?;
    let header = {
        let mut header_reader = BufReader::new(&mut infile);
        Header::read(&mut header_reader, format_name)?
    };
    let header_len = header.len() as u64;

    infile.seek(SeekFrom::Start(header_len))?;
    let mut tail = Vec::new();
    infile.read_to_end(&mut tail)?;

    let mut index = Index::new();
    let replayed = read::replay_into(&mut index, &tail)?;
    let in_pos = header_len + tail.len() as u64;

    let state = State {
        index,
        queue: std::collections::VecDeque::new(),
        out,
        infile,
        in_pos,
        header_len,
        logsize: replayed,
        closed: false,
        writer_failure: None,
    };

    let inner = Arc::new(Inner {
        state: Mutex::new(state),
        not_empty: Condvar::new(),
        empty: Condvar::new(),
        serializer,
        path: path.to_path_buf(),
        default: options.default,
        writer_thread: Mutex::new(None),
    });

    let worker = Arc::clone(&inner);
    let handle = thread::spawn(move || write::writer_loop(worker));
    *inner.writer_thread.lock().unwrap() = Some(handle);

    let erased: Arc<dyn registry::RegisteredDatabase> = Arc::clone(&inner);
    registry::register(erased);

    Ok(crate::Database { inner })
}
