//! Delimited feed output
//!
//! [`FeedRecord`] holds one product's cleaned fields in column order.
//! [`FeedWriter`] joins them with the field separator, encodes the line to
//! the output charset and hands it to a [`FeedSink`].

use crate::config::FeedConfig;
use crate::encoding::OutputCharset;
use std::io;

/// Columns that are always present, in output order
const LEADING_COLUMNS: [&str; 9] = [
    "id",
    "title",
    "link",
    "description",
    "image_link",
    "categories",
    "availability",
    "brand",
    "mpn",
];
const PRICE_COLUMNS: [&str; 2] = ["price", "sale_price"];
const TRAILING_COLUMNS: [&str; 2] = ["extra_title_1", "extra_title_2"];

/// Destination for encoded feed lines
pub trait FeedSink {
    /// Write one complete line, terminator included
    fn write_record(&mut self, line: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

impl<W: io::Write> FeedSink for W {
    fn write_record(&mut self, line: &[u8]) -> io::Result<()> {
        io::Write::write_all(self, line)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(self)
    }
}

/// When the writer flushes its sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlushPolicy {
    /// After the header and after every record
    #[default]
    EveryRecord,
    /// Only when the writer finishes
    OnFinish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Idle,
    HeaderEmitted,
    Streaming,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    InStock,
    OutOfStock,
}

impl Availability {
    pub fn from_quantity(quantity: i64) -> Self {
        if quantity > 0 {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in stock",
            Self::OutOfStock => "out of stock",
        }
    }
}

/// One output row, fields already cleaned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub description: String,
    pub image_link: String,
    pub categories: String,
    pub availability: Availability,
    pub brand: String,
    pub mpn: String,
    pub price: Option<String>,
    pub sale_price: Option<String>,
    pub extra_title_1: String,
    pub extra_title_2: String,
}

impl FeedRecord {
    /// Column names for the header line
    pub fn header(show_prices: bool) -> Vec<&'static str> {
        let mut columns = LEADING_COLUMNS.to_vec();
        if show_prices {
            columns.extend(PRICE_COLUMNS);
        }
        columns.extend(TRAILING_COLUMNS);
        columns
    }

    pub fn column_count(show_prices: bool) -> usize {
        let prices = if show_prices { PRICE_COLUMNS.len() } else { 0 };
        LEADING_COLUMNS.len() + prices + TRAILING_COLUMNS.len()
    }

    /// Field values in header order; absent prices are empty fields
    pub fn fields(&self, show_prices: bool) -> Vec<String> {
        let mut fields = vec![
            self.id.to_string(),
            self.title.clone(),
            self.link.clone(),
            self.description.clone(),
            self.image_link.clone(),
            self.categories.clone(),
            self.availability.as_str().to_string(),
            self.brand.clone(),
            self.mpn.clone(),
        ];
        if show_prices {
            fields.push(self.price.clone().unwrap_or_default());
            fields.push(self.sale_price.clone().unwrap_or_default());
        }
        fields.push(self.extra_title_1.clone());
        fields.push(self.extra_title_2.clone());
        fields
    }
}

/// Line writer over a [`FeedSink`]
///
/// `Idle → HeaderEmitted → Streaming → Done`. The header is optional;
/// records may follow `Idle` directly.
pub struct FeedWriter<S> {
    sink: S,
    separator: String,
    charset: OutputCharset,
    show_prices: bool,
    policy: FlushPolicy,
    state: WriterState,
    records: u64,
}

impl<S: FeedSink> FeedWriter<S> {
    pub fn new(sink: S, config: &FeedConfig) -> Self {
        Self {
            sink,
            separator: config.separators.field.to_string(),
            charset: config.charset,
            show_prices: config.show_prices,
            policy: FlushPolicy::default(),
            state: WriterState::Idle,
            records: 0,
        }
    }

    pub fn with_flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Records written so far
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        if self.state != WriterState::Idle {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "header must be the first line of the feed",
            ));
        }
        let header = FeedRecord::header(self.show_prices);
        self.write_line(&header)?;
        self.state = WriterState::HeaderEmitted;
        Ok(())
    }

    pub fn write_record(&mut self, record: &FeedRecord) -> io::Result<()> {
        if self.state == WriterState::Done {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "feed writer already finished",
            ));
        }
        let fields = record.fields(self.show_prices);
        self.write_line(&fields)?;
        self.state = WriterState::Streaming;
        self.records += 1;
        Ok(())
    }

    /// Flush and close the feed; later writes are refused
    pub fn finish(&mut self) -> io::Result<()> {
        if self.state != WriterState::Done {
            self.sink.flush()?;
            self.state = WriterState::Done;
        }
        Ok(())
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn write_line<T: AsRef<str>>(&mut self, fields: &[T]) -> io::Result<()> {
        let mut line = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                line.push_str(&self.separator);
            }
            line.push_str(field.as_ref());
        }
        line.push('\n');

        self.sink.write_record(&self.charset.encode(&line))?;
        if self.policy == FlushPolicy::EveryRecord {
            self.sink.flush()?;
        }
        Ok(())
    }
}
