/// File name of the merged document inside a job directory
pub const MERGED_FILE_NAME: &str = "merged.pdf";

/// Restricts a file name to `[A-Za-z0-9.-]`, replacing everything else with `_`
///
/// Path separators never survive sanitization, so the result cannot leave
/// the job directory it is joined onto (callers still reject `.` and `..`).
///
/// # Examples
///
/// ```
/// use site2pdf::url::sanitize_filename;
///
/// assert_eq!(sanitize_filename("page_1.pdf"), "page_1.pdf");
/// assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Name of the rendered PDF for the `n`th page (1-based)
pub fn page_file_name(n: usize) -> String {
    sanitize_filename(&format!("page_{}.pdf", n))
}
