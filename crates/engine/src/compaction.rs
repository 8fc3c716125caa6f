//! Compaction and clearing: both rewrite the journal to a sibling temp
//! file, copy over any records appended while the rewrite was in flight,
//! and swap it into place with an atomic rename.
//!
//! `compact()` dumps the current in-memory index as one `Put` per live
//! key, shrinking the journal to just its live state. `clear()` is the
//! same machinery with an empty dump: a fresh header and nothing else.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use journal::{Header, Record};
use lock::ExclusiveGuard;
use serializer::Serializer;

use crate::{read, write, Database, DbError};

impl<T, S> Database<T, S>
where
    T: Send + Sync + 'static,
    S: Serializer<T> + 'static,
{
    /// Rewrites the journal to contain exactly one `Put` per live key,
    /// reclaiming space from overwritten and deleted keys.
    pub fn compact(&self) -> Result<(), DbError> {
        self.rewrite(false)
    }

    /// Rewrites the journal to an empty database (just the header),
    /// discarding every key.
    pub fn clear(&self) -> Result<(), DbError> {
        self.rewrite(true)
    }

    fn rewrite(&self, clearing: bool) -> Result<(), DbError> {
        let format_name = self.inner.serializer.format_name();
        let tmp_path = sibling_temp_path(&self.inner.path);

        // Step 1: dump the entries currently in memory to the temp file,
        // without holding any lock beyond the brief snapshot read.
        let dump = {
            let guard = self.inner.state.lock().unwrap();
            let mut buf = Header::new(format_name).to_bytes();
            if !clearing {
                for (key, value) in guard.index.iter() {
                    buf.extend_from_slice(&journal::encode(&Record::Put {
                        key: key.clone(),
                        value: value.clone(),
                    }));
                }
            }
            buf
        };
        fs::write(&tmp_path, &dump)?;

        // Step 2: under the database mutex, flush the writer queue, then
        // hold the exclusive lock for the swap. Every exclusive acquisition
        // must revalidate the handle against a concurrent rename first —
        // the same reopen-on-`nlink == 0` dance `write::append_one` does —
        // since another process's compaction may have replaced the file
        // while this one was waiting for the queue to drain.
        let mut guard = self.inner.state.lock().unwrap();
        guard = write::wait_for_drain(&self.inner, guard);
        write::check_writer_failure(&mut guard)?;

        loop {
            let dup = guard.out.try_clone()?;
            let _exclusive = ExclusiveGuard::acquire(&dup)?;

            if lock::is_unlinked(&dup)? {
                drop(_exclusive);
                drop(dup);
                let (infile, header_len) = read::reopen_in(&self.inner.path, format_name)?;
                guard.out = write::reopen_out(&self.inner.path)?;
                guard.infile = infile;
                guard.header_len = header_len;
                guard.in_pos = header_len;
                continue;
            }

            let current_size = guard.infile.metadata()?.len();
            if current_size == dump.len() as u64 {
                // Another handle already produced an equivalent rewrite
                // (§4.6 step 2's no-op case): nothing left to copy forward.
                fs::remove_file(&tmp_path)?;
            } else {
                if current_size > guard.in_pos {
                    let mut tail = vec![0u8; (current_size - guard.in_pos) as usize];
                    let mut reader = File::open(&self.inner.path)?;
                    reader.seek(SeekFrom::Start(guard.in_pos))?;
                    reader.read_exact(&mut tail)?;

                    let mut tmp_file = OpenOptions::new().append(true).open(&tmp_path)?;
                    tmp_file.write_all(&tail)?;
                    tmp_file.sync_all()?;
                }
                fs::rename(&tmp_path, &self.inner.path)?;
            }
            break;
        }

        // Step 3: unless the no-op branch above ran, this handle's `infile`
        // now points at an unlinked inode; `refresh_index` detects that,
        // reopens against the new file, and rebuilds the index from it —
        // correct for both compaction (the rebuilt index matches what we
        // dumped plus any copied tail) and clearing (the new file has
        // nothing past its header).
        read::refresh_index(&self.inner, &mut guard, false)?;
        Ok(())
    }
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(
        ".tmp.{}.{:?}",
        std::process::id(),
        std::thread::current().id()
    ));
    PathBuf::from(name)
}
