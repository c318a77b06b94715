// src/notify/compose.rs
//! Message bodies for each job.

use html_escape::encode_double_quoted_attribute;

use super::{Attachment, Notification};
use crate::delta::DailyDelta;
use crate::extract::FigureReport;
use crate::sources::severe_cases::SevereCaseRow;

pub const SEVERE_CASES_SUBJECT: &str = "厚労省：新型コロナ重症者数";
pub const RELEASE_LINK_SUBJECT: &str = "東京都の新型コロナデータ更新";
pub const RELEASE_PDF_SUBJECT: &str = "東京都の新型コロナ感染者数";
pub const RELEASE_FIGURES_SUBJECT: &str = "東京都の新型コロナ感染者数";

pub fn severe_cases(previous: &SevereCaseRow, current: &SevereCaseRow) -> Notification {
    let delta = DailyDelta::new(previous.count, current.count);
    let text = format!(
        "{SEVERE_CASES_SUBJECT}\n\
         日付: {}  重症者数: {}\n\
         日付: {}  重症者数: {}  前日比: {delta}\n\n\
         ※厚労省オープンデータから自動取得しています\n",
        previous.date.format("%Y-%m-%d"),
        previous.count,
        current.date.format("%Y-%m-%d"),
        current.count,
    );
    Notification::plain(SEVERE_CASES_SUBJECT, text)
}

pub fn release_link(document_url: &str, landing_url: &str) -> Notification {
    let text = format!(
        "東京都の新型コロナデータが更新されました。\n\n\
         感染者データ: {document_url}\n\
         東京都HPを確認してください: {landing_url}\n"
    );
    let html = format!(
        "<html>\n  <head></head>\n  <body>\n    \
         <p>東京都の新型コロナデータが更新されました。</p>\n    \
         <p>感染者データ<br>\n      <a href=\"{}\">感染者データへリンク</a>\n    </p>\n    \
         <p>※東京都HP更新時に自動送信しています<br>\n      <a href=\"{}\">東京都福祉保健局HP</a>\n    </p>\n  \
         </body>\n</html>\n",
        encode_double_quoted_attribute(document_url),
        encode_double_quoted_attribute(landing_url),
    );
    Notification::plain(RELEASE_LINK_SUBJECT, text).with_html(html)
}

pub fn release_pdf(document_url: &str, landing_url: &str, attachment: Attachment) -> Notification {
    let text = format!(
        "東京都の新型コロナ感染者数をPDF添付ファイルで送ります。\n\n\
         出典: {document_url}\n\
         添付: {}\n",
        attachment.filename
    );
    let html = format!(
        "<html>\n  <head></head>\n  <body>\n    \
         <p>東京都の新型コロナ感染者数をPDF添付ファイルで送ります</p>\n    \
         <p>\n      <a href=\"{}\">東京都のリリースへのリンク</a>\n    </p>\n  \
         </body>\n</html>\n",
        encode_double_quoted_attribute(landing_url),
    );
    Notification::plain(RELEASE_PDF_SUBJECT, text)
        .with_html(html)
        .with_attachment(attachment)
}

pub fn release_figures(figures: &FigureReport, attachment: Attachment) -> Notification {
    let headline = figures.text.headline.as_deref().unwrap_or("(見出しを取得できませんでした)");
    let from_text = figures.text.count.as_deref().unwrap_or("-");
    let from_table = figures
        .table
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    let text = format!(
        "東京都の新型コロナ感染者数を送ります。\n\
         {headline}\n\
         ★東京都の感染者数: 【テキストから】{from_text}【表から(確認用)】{from_table}\n"
    );
    Notification::plain(RELEASE_FIGURES_SUBJECT, text).with_attachment(attachment)
}

/// First body line, used in logs.
pub fn preview(n: &Notification) -> &str {
    n.text.lines().next().unwrap_or_default()
}
