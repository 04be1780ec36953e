/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{common::types::Position, tools::error::AppError};
use futures::Stream;
use serde::Deserialize;
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::mpsc::{self, Receiver, Sender},
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::*;

pub type PositionEvent = Result<Position, AppError>;

/// A continuous source of position fixes, such as the device's location
/// service.
pub trait PositionSource: Send {
    /// Starts the watch. A source hands out a single watch for its whole
    /// lifetime; asking again yields `AppError::AlreadySubscribed`.
    fn subscribe(&mut self) -> Result<PositionWatch, AppError>;
}

/// Live subscription to a `PositionSource`. Fixes arrive in the order the
/// source produced them. The stream ends after a permission or availability
/// error, or when the source itself stops. Dropping the watch unsubscribes.
pub struct PositionWatch {
    events: ReceiverStream<PositionEvent>,
    finished: bool,
}

impl PositionWatch {
    fn new(rx: Receiver<PositionEvent>) -> Self {
        PositionWatch {
            events: ReceiverStream::new(rx),
            finished: false,
        }
    }

    pub fn unsubscribe(mut self) {
        self.events.close();
    }
}

impl Stream for PositionWatch {
    type Item = PositionEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.events).poll_next(cx) {
            Poll::Ready(Some(Err(err))) => {
                if err.ends_position_stream() {
                    this.finished = true;
                    this.events.close();
                }
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

/// Handle used to feed a `ChannelPositionSource`.
#[derive(Clone)]
pub struct PositionFeed {
    tx: Sender<PositionEvent>,
}

impl PositionFeed {
    /// Returns `false` once the watch has been dropped.
    pub async fn fix(&self, position: Position) -> bool {
        self.tx.send(Ok(position)).await.is_ok()
    }

    pub async fn fail(&self, err: AppError) -> bool {
        self.tx.send(Err(err)).await.is_ok()
    }
}

/// Position source fed in-process through a `PositionFeed`.
pub struct ChannelPositionSource {
    rx: Option<Receiver<PositionEvent>>,
}

impl ChannelPositionSource {
    pub fn new(buffer: usize) -> (Self, PositionFeed) {
        let (tx, rx) = mpsc::channel(buffer);
        (ChannelPositionSource { rx: Some(rx) }, PositionFeed { tx })
    }
}

impl PositionSource for ChannelPositionSource {
    fn subscribe(&mut self) -> Result<PositionWatch, AppError> {
        self.rx
            .take()
            .map(PositionWatch::new)
            .ok_or(AppError::AlreadySubscribed)
    }
}

#[derive(Deserialize)]
struct FixLine {
    latitude: f64,
    longitude: f64,
}

/// Parses one line of a fix feed. Accepted forms are `lat,lng`, a JSON
/// object with `latitude` and `longitude`, or one of the geolocation error
/// codes `PERMISSION_DENIED`, `POSITION_UNAVAILABLE`, `TIMEOUT`. Blank lines
/// and `#` comments yield `None`.
pub fn parse_fix_line(line: &str) -> Option<PositionEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let event = match line {
        "PERMISSION_DENIED" => Err(AppError::PermissionDenied),
        "POSITION_UNAVAILABLE" => Err(AppError::PositionUnavailable(
            "reported by position feed".to_string(),
        )),
        "TIMEOUT" => Err(AppError::Timeout),
        _ if line.starts_with('{') => serde_json::from_str::<FixLine>(line)
            .map_err(|err| AppError::InvalidRequest(format!("bad fix line {line:?} : {err}")))
            .and_then(|fix| Position::new(fix.latitude, fix.longitude)),
        _ => match line.split_once(',') {
            Some((lat, lng)) => match (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
                (Ok(lat), Ok(lng)) => Position::new(lat, lng),
                _ => Err(AppError::InvalidRequest(format!("bad fix line {line:?}"))),
            },
            None => Err(AppError::InvalidRequest(format!("bad fix line {line:?}"))),
        },
    };
    Some(event)
}

/// Position source reading line-delimited fixes (see `parse_fix_line`) from
/// an async reader, e.g. the stdout of a GPS daemon piped into stdin. The
/// reader is released as soon as the watch is dropped, without waiting for
/// another line.
pub struct LinesPositionSource<R> {
    reader: Option<R>,
    buffer: usize,
}

impl<R> LinesPositionSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(reader: R, buffer: usize) -> Self {
        LinesPositionSource {
            reader: Some(reader),
            buffer,
        }
    }
}

async fn pump_fix_lines<R>(reader: R, tx: Sender<PositionEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                debug!("Position watch dropped, stopping fix reader");
                return;
            }
            next = lines.next_line() => next,
        };
        match next {
            Ok(Some(line)) => {
                let Some(event) = parse_fix_line(&line) else {
                    continue;
                };
                let terminal = matches!(&event, Err(err) if err.ends_position_stream());
                if tx.send(event).await.is_err() {
                    debug!("Position watch dropped, stopping fix reader");
                    return;
                }
                if terminal {
                    return;
                }
            }
            Ok(None) => {
                info!("Position feed reached end of input");
                return;
            }
            Err(err) => {
                let _ = tx
                    .send(Err(AppError::PositionUnavailable(err.to_string())))
                    .await;
                return;
            }
        }
    }
}

impl<R> PositionSource for LinesPositionSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    fn subscribe(&mut self) -> Result<PositionWatch, AppError> {
        let reader = self.reader.take().ok_or(AppError::AlreadySubscribed)?;
        let (tx, rx) = mpsc::channel(self.buffer);
        tokio::spawn(pump_fix_lines(reader, tx));
        Ok(PositionWatch::new(rx))
    }
}
