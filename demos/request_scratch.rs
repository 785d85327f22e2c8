use std::{sync::mpsc, thread};

use scratchpad::{ArenaConfig, ArenaError, NativeArena};

/// Per-worker arena sizing, as a host service would keep it in its config file.
const WORKER_CONFIG: &str = r#"
capacity = 256
alignment = 64
"#;

const WORKERS: usize = 3;

/// One parsed header: offsets into the request line, kept in arena memory.
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct Field {
  start: u32,
  len: u32,
}

/// Handles one request using only arena memory.
///
/// Returns the number of fields and the sum of the request's bytes, or
/// `OutOfMemory` if the request does not fit into the worker's scratch space.
fn handle_request(
  arena: &NativeArena,
  line: &str,
) -> Result<(usize, u64), ArenaError> {
  // --------------------------------------------------------------------
  // 1) Copy the raw request into the arena.
  // --------------------------------------------------------------------
  let raw = arena.alloc_slice_copy(line.as_bytes())?;

  // --------------------------------------------------------------------
  // 2) Split it into fields, stored in a table sized exactly for them.
  // --------------------------------------------------------------------
  let count = line.split(' ').filter(|token| !token.is_empty()).count();
  let mut fields = arena.alloc_slice::<Field>(count)?;
  let mut next = 0;
  let mut start = 0;

  for (i, &byte) in raw.iter().chain(std::iter::once(&b' ')).enumerate() {
    if byte == b' ' {
      if i > start {
        fields[next] = Field {
          start: start as u32,
          len: (i - start) as u32,
        };
        next += 1;
      }
      start = i + 1;
    }
  }

  // --------------------------------------------------------------------
  // 3) Do some work over the scratch data.
  // --------------------------------------------------------------------
  let checksum = fields
    .iter()
    .flat_map(|f| &raw[f.start as usize..(f.start + f.len) as usize])
    .map(|&b| b as u64)
    .sum();
  let count = fields.len();

  // --------------------------------------------------------------------
  // 4) Give the memory back in LIFO order: the field table first, then the
  //    raw copy. Each free also returns the padding in front of its view.
  // --------------------------------------------------------------------
  let reclaimed = arena.free(fields).unwrap_or(0);
  match arena.free(raw) {
    Ok(bytes) => log::debug!("reclaimed {} bytes, {} still in use", reclaimed + bytes, arena.bytes_used()),
    Err(_) => log::warn!("raw copy was not the most recent allocation; it waits for reset"),
  }

  Ok((count, checksum))
}

fn main() {
  env_logger::Builder::from_default_env()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();

  let config: ArenaConfig = match toml::from_str(WORKER_CONFIG) {
    Ok(config) => config,
    Err(err) => {
      log::error!("invalid worker config: {err}");
      return;
    }
  };

  let requests = [
    "GET /api/users HTTP/1.1",
    "POST /api/data HTTP/1.1",
    "GET /health HTTP/1.1",
    "PUT /api/users/42 HTTP/1.1",
    "GET /a/very/long/path/that/keeps/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going/and/going HTTP/1.1",
    "DELETE /api/sessions/7 HTTP/1.1",
  ];

  // --------------------------------------------------------------------
  // Every worker owns its own arena: no locks on the allocation path.
  // --------------------------------------------------------------------
  let (results_tx, results_rx) = mpsc::channel();
  let mut workers = Vec::new();

  for worker in 0..WORKERS {
    let config = config.clone();
    let results_tx = results_tx.clone();
    let jobs: Vec<&'static str> = requests.iter().skip(worker).step_by(WORKERS).copied().collect();

    workers.push(thread::spawn(move || {
      let mut arena: NativeArena = match NativeArena::with_config(&config) {
        Ok(arena) => arena,
        Err(err) => {
          log::error!("worker {worker}: {err}");
          return;
        }
      };

      for line in jobs {
        let outcome = match handle_request(&arena, line) {
          Err(ArenaError::OutOfMemory { requested, available }) => {
            // Retrying is the caller's call: redo the whole request in a
            // one-off arena big enough for it.
            log::warn!("worker {worker}: request needs {requested} bytes, {available} left; retrying");
            NativeArena::new(config.capacity * 4).and_then(|big: NativeArena| handle_request(&big, line))
          }
          other => other,
        };

        if results_tx.send((worker, line, outcome)).is_err() {
          log::warn!("worker {worker}: result receiver is gone, stopping");
          break;
        }
        arena.reset();
      }
    }));
  }

  drop(results_tx);

  for (worker, line, outcome) in results_rx {
    match outcome {
      Ok((fields, checksum)) => {
        log::info!("worker {worker}: {fields} fields, checksum {checksum}: {line:.40}")
      }
      Err(err) => log::error!("worker {worker}: {err}: {line:.40}"),
    }
  }

  for worker in workers {
    if worker.join().is_err() {
      log::error!("worker panicked");
    }
  }
}
